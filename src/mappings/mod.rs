pub mod char_to_key;
pub mod key_to_char;

pub use char_to_key::CharToKey;
pub use key_to_char::{CharacterCases, KeyToChar};
