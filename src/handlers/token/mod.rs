pub mod metadata;

pub use metadata::get_token_metadata;
