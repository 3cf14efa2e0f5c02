pub mod chunk;
pub mod engine;
pub mod gtts;

pub use chunk::{MAX_CHUNK_CHARS, split_for_speech};
pub use engine::{OpenAiTts, SpeechEngine, TtsProvider, TtsProviderKind, TtsRequest, create_tts};
pub use gtts::GoogleTranslateTts;
