use super::{Serialize, SerializeSequence, Serializer};

impl<'a> Serialize for &'a str {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_string(self)
    }
}

impl Serialize for String {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_string(self.as_str())
    }
}

impl Serialize for bool {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bool(*self)
    }
}

impl Serialize for usize {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_usize(*self)
    }
}

impl Serialize for u8 {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_usize(*self as usize)
    }
}

impl Serialize for u16 {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_usize(*self as usize)
    }
}

impl Serialize for u32 {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_usize(*self as usize)
    }
}

impl Serialize for u64 {
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(*self)
    }
}

impl<T> Serialize for [T]
where
    T: Serialize,
{
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        let mut sequence = serializer.serialize_sequence()?;

        for element in self {
            sequence.serialize_element(element)?;
        }

        sequence.finish()
    }
}

impl<T> Serialize for Vec<T>
where
    T: Serialize,
{
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        self.as_slice().serialize_to(serializer)
    }
}

impl<'a, T> Serialize for &'a [T]
where
    T: Serialize,
{
    fn serialize_to<S>(&self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        (**self).serialize_to(serializer)
    }
}
