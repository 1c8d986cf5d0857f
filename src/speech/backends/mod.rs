//! Platform-specific speech backends

// Native TTS backend using the tts crate (cross-platform)
pub mod native;

// espeak-ng subprocess backend with real pause, preferred on WSL
pub mod espeak;
