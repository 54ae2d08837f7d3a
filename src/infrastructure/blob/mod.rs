pub mod client_token;
