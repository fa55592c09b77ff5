pub mod muscl_hancock;
