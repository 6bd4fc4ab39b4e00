//! Serde adapters that apply a `FieldNaming` policy to struct field names.
//!
//! # Design
//! The policy must touch struct fields and nothing else: enum variant tags,
//! map keys and string values pass through untouched. A `serde_json::Value`
//! tree cannot tell a struct from a map, so the renaming happens while serde
//! drives the data model instead.
//!
//! - `Renamed` wraps a value for serialization. Structs are written as maps
//!   whose keys are the renamed field names; every nested value is wrapped
//!   again.
//! - `RenameDeserializer` wraps a deserializer. `deserialize_struct` is the
//!   only place the expected field names are known, so keys of that object
//!   are matched back to the Rust field name before serde sees them.
//!
//! Types that deserialize through serde's buffered content (untagged and
//! internally tagged enums, `#[serde(flatten)]`) never reach
//! `deserialize_struct`; their keys are not renamed on decode.

use std::fmt;

use serde::de::{self, DeserializeSeed, IntoDeserializer, Visitor};
use serde::ser::{self, Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::codec::FieldNaming;

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

pub(crate) struct Renamed<'a, T: ?Sized> {
    value: &'a T,
    naming: FieldNaming,
}

impl<'a, T: ?Sized> Renamed<'a, T> {
    pub(crate) fn new(value: &'a T, naming: FieldNaming) -> Self {
        Self { value, naming }
    }
}

impl<T: Serialize + ?Sized> Serialize for Renamed<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(RenameSerializer {
            inner: serializer,
            naming: self.naming,
        })
    }
}

struct RenameSerializer<S> {
    inner: S,
    naming: FieldNaming,
}

macro_rules! forward_serialize {
    ($($method:ident($ty:ty))*) => {$(
        fn $method(self, v: $ty) -> Result<S::Ok, S::Error> {
            self.inner.$method(v)
        }
    )*};
}

impl<S: Serializer> Serializer for RenameSerializer<S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = Elements<S::SerializeSeq>;
    type SerializeTuple = Elements<S::SerializeTuple>;
    type SerializeTupleStruct = Elements<S::SerializeTupleStruct>;
    type SerializeTupleVariant = Elements<S::SerializeTupleVariant>;
    type SerializeMap = Entries<S::SerializeMap>;
    type SerializeStruct = StructFields<S::SerializeMap>;
    type SerializeStructVariant = VariantFields<S::SerializeMap>;

    forward_serialize! {
        serialize_bool(bool)
        serialize_i8(i8) serialize_i16(i16) serialize_i32(i32) serialize_i64(i64) serialize_i128(i128)
        serialize_u8(u8) serialize_u16(u16) serialize_u32(u32) serialize_u64(u64) serialize_u128(u128)
        serialize_f32(f32) serialize_f64(f64)
        serialize_char(char) serialize_str(&str) serialize_bytes(&[u8])
        serialize_unit_struct(&'static str)
    }

    fn serialize_none(self) -> Result<S::Ok, S::Error> {
        self.inner.serialize_none()
    }

    fn serialize_unit(self) -> Result<S::Ok, S::Error> {
        self.inner.serialize_unit()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<S::Ok, S::Error> {
        self.inner.serialize_some(&Renamed::new(value, self.naming))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<S::Ok, S::Error> {
        self.inner.serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        self.inner
            .serialize_newtype_struct(name, &Renamed::new(value, self.naming))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        self.inner.serialize_newtype_variant(
            name,
            variant_index,
            variant,
            &Renamed::new(value, self.naming),
        )
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, S::Error> {
        Ok(Elements {
            inner: self.inner.serialize_seq(len)?,
            naming: self.naming,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, S::Error> {
        Ok(Elements {
            inner: self.inner.serialize_tuple(len)?,
            naming: self.naming,
        })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, S::Error> {
        Ok(Elements {
            inner: self.inner.serialize_tuple_struct(name, len)?,
            naming: self.naming,
        })
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, S::Error> {
        Ok(Elements {
            inner: self
                .inner
                .serialize_tuple_variant(name, variant_index, variant, len)?,
            naming: self.naming,
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, S::Error> {
        Ok(Entries {
            inner: self.inner.serialize_map(len)?,
            naming: self.naming,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, S::Error> {
        Ok(StructFields {
            inner: self.inner.serialize_map(Some(len))?,
            naming: self.naming,
        })
    }

    /// Written as `{variant: {fields}}`, the externally tagged shape. The
    /// fields are buffered because the outer map entry needs them whole.
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, S::Error> {
        Ok(VariantFields {
            inner: self.inner.serialize_map(Some(1))?,
            variant,
            fields: Map::new(),
            naming: self.naming,
        })
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

struct Elements<C> {
    inner: C,
    naming: FieldNaming,
}

impl<C: ser::SerializeSeq> ser::SerializeSeq for Elements<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_element(&Renamed::new(value, self.naming))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTuple> ser::SerializeTuple for Elements<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_element(&Renamed::new(value, self.naming))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTupleStruct> ser::SerializeTupleStruct for Elements<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_field(&Renamed::new(value, self.naming))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTupleVariant> ser::SerializeTupleVariant for Elements<C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), C::Error> {
        self.inner.serialize_field(&Renamed::new(value, self.naming))
    }

    fn end(self) -> Result<C::Ok, C::Error> {
        self.inner.end()
    }
}

/// Map entries keep their keys; only the values are walked.
struct Entries<M> {
    inner: M,
    naming: FieldNaming,
}

impl<M: SerializeMap> SerializeMap for Entries<M> {
    type Ok = M::Ok;
    type Error = M::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), M::Error> {
        self.inner.serialize_key(key)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), M::Error> {
        self.inner.serialize_value(&Renamed::new(value, self.naming))
    }

    fn end(self) -> Result<M::Ok, M::Error> {
        self.inner.end()
    }
}

struct StructFields<M> {
    inner: M,
    naming: FieldNaming,
}

impl<M: SerializeMap> ser::SerializeStruct for StructFields<M> {
    type Ok = M::Ok;
    type Error = M::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), M::Error> {
        self.inner
            .serialize_entry(&self.naming.apply(key), &Renamed::new(value, self.naming))
    }

    fn end(self) -> Result<M::Ok, M::Error> {
        self.inner.end()
    }
}

struct VariantFields<M> {
    inner: M,
    variant: &'static str,
    fields: Map<String, Value>,
    naming: FieldNaming,
}

impl<M: SerializeMap> ser::SerializeStructVariant for VariantFields<M> {
    type Ok = M::Ok;
    type Error = M::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), M::Error> {
        let value = serde_json::to_value(Renamed::new(value, self.naming))
            .map_err(<M::Error as ser::Error>::custom)?;
        self.fields.insert(self.naming.apply(key), value);
        Ok(())
    }

    fn end(mut self) -> Result<M::Ok, M::Error> {
        self.inner
            .serialize_entry(self.variant, &Value::Object(self.fields))?;
        self.inner.end()
    }
}

// ---------------------------------------------------------------------------
// Deserialization
// ---------------------------------------------------------------------------

pub(crate) struct RenameDeserializer<D> {
    inner: D,
    naming: FieldNaming,
}

impl<D> RenameDeserializer<D> {
    pub(crate) fn new(inner: D, naming: FieldNaming) -> Self {
        Self { inner, naming }
    }
}

macro_rules! forward_deserialize {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, D::Error> {
            self.inner.$method(RenameVisitor::new(visitor, self.naming, None))
        }
    )*};
}

impl<'de, D: de::Deserializer<'de>> de::Deserializer<'de> for RenameDeserializer<D> {
    type Error = D::Error;

    forward_deserialize! {
        deserialize_any deserialize_bool
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
        deserialize_f32 deserialize_f64 deserialize_char
        deserialize_str deserialize_string deserialize_bytes deserialize_byte_buf
        deserialize_option deserialize_unit deserialize_seq deserialize_map
        deserialize_identifier deserialize_ignored_any
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.inner
            .deserialize_unit_struct(name, RenameVisitor::new(visitor, self.naming, None))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.inner
            .deserialize_newtype_struct(name, RenameVisitor::new(visitor, self.naming, None))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, D::Error> {
        self.inner
            .deserialize_tuple(len, RenameVisitor::new(visitor, self.naming, None))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.inner
            .deserialize_tuple_struct(name, len, RenameVisitor::new(visitor, self.naming, None))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.inner.deserialize_struct(
            name,
            fields,
            RenameVisitor::new(visitor, self.naming, Some(fields)),
        )
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.inner
            .deserialize_enum(name, variants, RenameVisitor::new(visitor, self.naming, None))
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

struct RenameSeed<S> {
    seed: S,
    naming: FieldNaming,
}

impl<'de, S: DeserializeSeed<'de>> DeserializeSeed<'de> for RenameSeed<S> {
    type Value = S::Value;

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<S::Value, D::Error> {
        self.seed
            .deserialize(RenameDeserializer::new(deserializer, self.naming))
    }
}

/// `fields` is set when the visitor is building a struct.
struct RenameVisitor<V> {
    inner: V,
    naming: FieldNaming,
    fields: Option<&'static [&'static str]>,
}

impl<V> RenameVisitor<V> {
    fn new(inner: V, naming: FieldNaming, fields: Option<&'static [&'static str]>) -> Self {
        Self {
            inner,
            naming,
            fields,
        }
    }
}

macro_rules! forward_visit {
    ($($method:ident($ty:ty))*) => {$(
        fn $method<E: de::Error>(self, v: $ty) -> Result<V::Value, E> {
            self.inner.$method(v)
        }
    )*};
}

impl<'de, V: Visitor<'de>> Visitor<'de> for RenameVisitor<V> {
    type Value = V::Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.expecting(f)
    }

    forward_visit! {
        visit_bool(bool)
        visit_i8(i8) visit_i16(i16) visit_i32(i32) visit_i64(i64) visit_i128(i128)
        visit_u8(u8) visit_u16(u16) visit_u32(u32) visit_u64(u64) visit_u128(u128)
        visit_f32(f32) visit_f64(f64) visit_char(char)
        visit_str(&str) visit_borrowed_str(&'de str) visit_string(String)
        visit_bytes(&[u8]) visit_borrowed_bytes(&'de [u8]) visit_byte_buf(Vec<u8>)
    }

    fn visit_none<E: de::Error>(self) -> Result<V::Value, E> {
        self.inner.visit_none()
    }

    fn visit_unit<E: de::Error>(self) -> Result<V::Value, E> {
        self.inner.visit_unit()
    }

    fn visit_some<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<V::Value, D::Error> {
        self.inner
            .visit_some(RenameDeserializer::new(deserializer, self.naming))
    }

    fn visit_newtype_struct<D: de::Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<V::Value, D::Error> {
        self.inner
            .visit_newtype_struct(RenameDeserializer::new(deserializer, self.naming))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, seq: A) -> Result<V::Value, A::Error> {
        self.inner.visit_seq(RenameSeq {
            inner: seq,
            naming: self.naming,
        })
    }

    fn visit_map<A: de::MapAccess<'de>>(self, map: A) -> Result<V::Value, A::Error> {
        self.inner.visit_map(RenameMap {
            inner: map,
            naming: self.naming,
            fields: self.fields,
        })
    }

    fn visit_enum<A: de::EnumAccess<'de>>(self, data: A) -> Result<V::Value, A::Error> {
        self.inner.visit_enum(RenameEnum {
            inner: data,
            naming: self.naming,
        })
    }
}

struct RenameSeq<A> {
    inner: A,
    naming: FieldNaming,
}

impl<'de, A: de::SeqAccess<'de>> de::SeqAccess<'de> for RenameSeq<A> {
    type Error = A::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, A::Error> {
        self.inner.next_element_seed(RenameSeed {
            seed,
            naming: self.naming,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        self.inner.size_hint()
    }
}

struct RenameMap<A> {
    inner: A,
    naming: FieldNaming,
    fields: Option<&'static [&'static str]>,
}

impl<'de, A: de::MapAccess<'de>> de::MapAccess<'de> for RenameMap<A> {
    type Error = A::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, A::Error> {
        let Some(fields) = self.fields else {
            return self.inner.next_key_seed(seed);
        };
        let Some(key) = self.inner.next_key::<String>()? else {
            return Ok(None);
        };
        // Keys that match no renamed field are passed on as they came.
        let naming = self.naming;
        let key = match fields.iter().find(|field| naming.apply(field) == key) {
            Some(field) => (*field).to_string(),
            None => key,
        };
        let key: de::value::StringDeserializer<A::Error> = key.into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<T::Value, A::Error> {
        self.inner.next_value_seed(RenameSeed {
            seed,
            naming: self.naming,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        self.inner.size_hint()
    }
}

struct RenameEnum<A> {
    inner: A,
    naming: FieldNaming,
}

impl<'de, A: de::EnumAccess<'de>> de::EnumAccess<'de> for RenameEnum<A> {
    type Error = A::Error;
    type Variant = RenameVariant<A::Variant>;

    fn variant_seed<T: DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<(T::Value, Self::Variant), A::Error> {
        let (tag, variant) = self.inner.variant_seed(seed)?;
        Ok((
            tag,
            RenameVariant {
                inner: variant,
                naming: self.naming,
            },
        ))
    }
}

struct RenameVariant<A> {
    inner: A,
    naming: FieldNaming,
}

impl<'de, A: de::VariantAccess<'de>> de::VariantAccess<'de> for RenameVariant<A> {
    type Error = A::Error;

    fn unit_variant(self) -> Result<(), A::Error> {
        self.inner.unit_variant()
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, A::Error> {
        self.inner.newtype_variant_seed(RenameSeed {
            seed,
            naming: self.naming,
        })
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, A::Error> {
        self.inner
            .tuple_variant(len, RenameVisitor::new(visitor, self.naming, None))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, A::Error> {
        self.inner
            .struct_variant(fields, RenameVisitor::new(visitor, self.naming, Some(fields)))
    }
}
