pub use database::MongodbDatabase;
pub use database_builder::MongodbDatabaseBuilder;
use mongodb::options::Compressor;

pub mod conversions;
pub mod database;
pub mod database_builder;

/// Available compression algorithms (in recommended order):
/// - Zstd (best compression ratio)
/// - Zlib (good balance of speed and compression)
/// - Snappy (fastest, but less compression)
pub(crate) fn get_compressors() -> Option<Vec<Compressor>> {
    Some(vec![
        Compressor::Zstd { level: None },
        Compressor::Zlib { level: None },
        Compressor::Snappy,
    ])
}
