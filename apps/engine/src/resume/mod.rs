pub mod ats;
pub mod handlers;
pub mod improve;
pub mod intake;
pub mod prompts;
pub mod sections;
pub mod semantic_fit;
