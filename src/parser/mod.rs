//! IG Script decoding: component scanning, combination parsing, nested statements,
//! component pairs and private links.

mod combination;
mod scanner;
mod statement;
mod suffix;

pub use combination::{contains_operator, parse_combination, Delimiters};
pub use scanner::{clean_input, scan_segments, validate_balance, Content, Header, Segment};
pub use statement::{decode, Decoded, StatementParser};
pub use suffix::link_private_properties;
