pub mod amount_input;
