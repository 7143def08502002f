mod serializer;

pub use serializer::JsonSerializer;
