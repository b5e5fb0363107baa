pub mod enrichment;
pub mod ingest;
pub mod model;
pub mod normalizer;
pub mod providers;
pub mod recommender;
pub mod similarity;
pub mod stop_words;
pub mod vectorizer;
