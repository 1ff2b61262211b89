#![doc = include_str!("../README.md")]
#![warn(missing_docs, unused_imports)]

pub use crtpaillier_he::cryptosystems;
pub use crtpaillier_numbertheory;
pub use crtpaillier_traits;
