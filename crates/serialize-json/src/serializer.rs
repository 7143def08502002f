use std::fmt::{self, Write};

use serialize::{Serialize, SerializeMap, SerializeSequence, SerializeStruct, Serializer};

/// Writes compact JSON into an in-memory buffer.
///
/// There is no reader-side counterpart here: the report this crate exists
/// for only ever flows outward, towards a flow-metadata sink.
pub struct JsonSerializer<W> {
    writer: W,
}

impl JsonSerializer<String> {
    pub fn serialize_to_string<T>(value: &T) -> Result<String, fmt::Error>
    where
        T: Serialize,
    {
        let mut serializer = Self {
            writer: String::new(),
        };
        value.serialize_to(&mut serializer)?;
        Ok(serializer.writer)
    }
}

impl<W> Serializer for JsonSerializer<W>
where
    W: Write,
{
    type Error = fmt::Error;

    type SequenceSerializer<'a> = SequenceSerializer<'a, W> where Self: 'a;
    type MapSerializer<'a> = MapSerializer<'a, W> where Self: 'a;
    type StructSerializer<'a> = StructSerializer<'a, W> where Self: 'a;

    fn serialize_bool(&mut self, value: bool) -> Result<(), Self::Error> {
        write!(self.writer, "{value}")
    }

    fn serialize_string(&mut self, value: &str) -> Result<(), Self::Error> {
        // `{value:?}` produces a quoted, escaped string for any `&str`; this
        // happens to be valid JSON for the ASCII/hex content every field in
        // this crate actually serializes.
        write!(self.writer, "{value:?}")
    }

    fn serialize_usize(&mut self, value: usize) -> Result<(), Self::Error> {
        write!(self.writer, "{value}")
    }

    fn serialize_u64(&mut self, value: u64) -> Result<(), Self::Error> {
        write!(self.writer, "{value}")
    }

    fn serialize_sequence(&mut self) -> Result<Self::SequenceSerializer<'_>, Self::Error> {
        write!(self.writer, "[")?;
        Ok(SequenceSerializer(CommaSeparated::new(self)))
    }

    fn serialize_map(&mut self) -> Result<Self::MapSerializer<'_>, Self::Error> {
        write!(self.writer, "{{")?;
        Ok(MapSerializer(CommaSeparated::new(self)))
    }

    fn serialize_struct(&mut self) -> Result<Self::StructSerializer<'_>, Self::Error> {
        write!(self.writer, "{{")?;
        Ok(StructSerializer(MapSerializer(CommaSeparated::new(self))))
    }
}

struct CommaSeparated<'a, W> {
    serializer: &'a mut JsonSerializer<W>,
    is_first_element: bool,
}

impl<'a, W> CommaSeparated<'a, W>
where
    W: Write,
{
    fn new(serializer: &'a mut JsonSerializer<W>) -> Self {
        Self {
            serializer,
            is_first_element: true,
        }
    }

    fn start_element(&mut self) -> Result<(), fmt::Error> {
        if self.is_first_element {
            self.is_first_element = false;
            Ok(())
        } else {
            write!(self.serializer.writer, ",")
        }
    }

    fn writer(&mut self) -> &mut W {
        &mut self.serializer.writer
    }
}

pub struct SequenceSerializer<'a, W>(CommaSeparated<'a, W>);
pub struct MapSerializer<'a, W>(CommaSeparated<'a, W>);
pub struct StructSerializer<'a, W>(MapSerializer<'a, W>);

impl<'a, W> SerializeSequence for SequenceSerializer<'a, W>
where
    W: Write,
{
    type Error = fmt::Error;

    fn serialize_element<T>(&mut self, element: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        self.0.start_element()?;
        element.serialize_to(self.0.serializer)
    }

    fn finish(mut self) -> Result<(), Self::Error> {
        write!(self.0.writer(), "]")
    }
}

impl<'a, W> SerializeMap for MapSerializer<'a, W>
where
    W: Write,
{
    type Error = fmt::Error;

    fn serialize_key_value_pair<K, V>(&mut self, key: &K, value: &V) -> Result<(), Self::Error>
    where
        K: Serialize,
        V: Serialize,
    {
        self.0.start_element()?;
        key.serialize_to(self.0.serializer)?;
        write!(self.0.writer(), ":")?;
        value.serialize_to(self.0.serializer)
    }

    fn finish(mut self) -> Result<(), Self::Error> {
        write!(self.0.writer(), "}}")
    }
}

impl<'a, W> SerializeStruct for StructSerializer<'a, W>
where
    W: Write,
{
    type Error = fmt::Error;

    fn serialize_field<T>(&mut self, name: &str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        self.0 .0.start_element()?;
        name.serialize_to(self.0 .0.serializer)?;
        write!(self.0 .0.writer(), ":")?;
        value.serialize_to(self.0 .0.serializer)
    }

    fn finish(self) -> Result<(), Self::Error> {
        self.0.finish()
    }
}
