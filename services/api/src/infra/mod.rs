pub mod db;
pub mod lichess;
pub mod sms;
