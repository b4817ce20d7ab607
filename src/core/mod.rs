pub mod db;
pub mod security;
pub mod session;
#[cfg(test)]
pub mod test_utils;
pub mod utils;
