pub mod token_code;
