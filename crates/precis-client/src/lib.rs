pub mod fetcher;
pub mod llm;


pub use fetcher::ReqwestFetcher;
pub use llm::OpenAiSummarizer;
