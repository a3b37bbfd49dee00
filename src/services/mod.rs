pub mod chatbot;
pub mod storage;
