mod common;
mod persistence;
mod suggestions;
mod validation;
