// CV evaluation: the structured record the model is asked for, the prompts that ask
// for it, and the parser that recovers it from free-form replies.

pub mod models;
pub mod parser;
pub mod prompts;
