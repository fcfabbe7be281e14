// Lexical primitives shared by every scorer: tokenization, term-frequency vectors,
// cosine similarity. Pure functions only; nothing here allocates shared state.

pub mod similarity;
pub mod tokenizer;
