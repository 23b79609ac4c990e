// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding module - turns chunk text into dense vectors for similarity
//! search, behind a provider trait so the model stays swappable.

pub mod provider;

pub use provider::{
    clean_chunk, create_provider, embed_chunk, CommandProvider, DummyProvider, EmbeddingProvider,
    FastEmbedder, FastEmbedderOptions,
};
