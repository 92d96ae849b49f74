//! `memarray`: fixed-size typed memory buffers.
//!
//! ```lua
//! local memarray = require("memarray")
//! local verts = memarray.new("float", 6)
//! verts[0] = 1.5
//! print(#verts, verts:size(), verts:type())  --> 6  24  float
//! ```
//!
//! Indices are zero-based, matching the C arrays the buffers are handed to.
//! A buffer may hold at most [`MAX_BYTES`] bytes; larger requests fail with a
//! Lua error instead of aborting the process.

use std::fmt;

use mlua::prelude::*;

/// Largest buffer `memarray.new` will allocate.
pub const MAX_BYTES: usize = 1 << 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
  UChar,
  Char,
  UShort,
  Short,
  UInt,
  Int,
  Float,
  Double,
}

impl ElementType {
  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "uchar" => Some(Self::UChar),
      "char" => Some(Self::Char),
      "ushort" => Some(Self::UShort),
      "short" => Some(Self::Short),
      "uint" => Some(Self::UInt),
      "int" => Some(Self::Int),
      "float" => Some(Self::Float),
      "double" => Some(Self::Double),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::UChar => "uchar",
      Self::Char => "char",
      Self::UShort => "ushort",
      Self::Short => "short",
      Self::UInt => "uint",
      Self::Int => "int",
      Self::Float => "float",
      Self::Double => "double",
    }
  }

  /// Size of one element in bytes
  pub fn width(&self) -> usize {
    match self {
      Self::UChar | Self::Char => 1,
      Self::UShort | Self::Short => 2,
      Self::UInt | Self::Int | Self::Float => 4,
      Self::Double => 8,
    }
  }
}

impl fmt::Display for ElementType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq)]
enum Storage {
  UChar(Vec<u8>),
  Char(Vec<i8>),
  UShort(Vec<u16>),
  Short(Vec<i16>),
  UInt(Vec<u32>),
  Int(Vec<i32>),
  Float(Vec<f32>),
  Double(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemArray {
  kind: ElementType,
  storage: Storage,
}

impl MemArray {
  /// Allocate a zeroed buffer of `len` elements.
  pub fn new(kind: ElementType, len: usize) -> LuaResult<Self> {
    let too_large = || {
      LuaError::external(format!(
        "memarray of {} {} elements exceeds {} bytes",
        len, kind, MAX_BYTES
      ))
    };
    match len.checked_mul(kind.width()) {
      Some(bytes) if bytes <= MAX_BYTES => {}
      _ => return Err(too_large()),
    }

    let storage = match kind {
      ElementType::UChar => Storage::UChar(zeroed(len)?),
      ElementType::Char => Storage::Char(zeroed(len)?),
      ElementType::UShort => Storage::UShort(zeroed(len)?),
      ElementType::Short => Storage::Short(zeroed(len)?),
      ElementType::UInt => Storage::UInt(zeroed(len)?),
      ElementType::Int => Storage::Int(zeroed(len)?),
      ElementType::Float => Storage::Float(zeroed(len)?),
      ElementType::Double => Storage::Double(zeroed(len)?),
    };
    Ok(Self { kind, storage })
  }

  pub fn kind(&self) -> ElementType {
    self.kind
  }

  pub fn len(&self) -> usize {
    match &self.storage {
      Storage::UChar(v) => v.len(),
      Storage::Char(v) => v.len(),
      Storage::UShort(v) => v.len(),
      Storage::Short(v) => v.len(),
      Storage::UInt(v) => v.len(),
      Storage::Int(v) => v.len(),
      Storage::Float(v) => v.len(),
      Storage::Double(v) => v.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Size of the buffer in bytes
  pub fn byte_size(&self) -> usize {
    self.len() * self.kind.width()
  }

  fn slot(&self, index: i64) -> LuaResult<usize> {
    usize::try_from(index)
      .ok()
      .filter(|i| *i < self.len())
      .ok_or_else(|| LuaError::external(format!("memarray index {} out of range [0, {})", index, self.len())))
  }

  pub fn get(&self, index: i64) -> LuaResult<LuaValue> {
    let i = self.slot(index)?;
    Ok(match &self.storage {
      Storage::UChar(v) => LuaValue::Integer(v[i] as i64),
      Storage::Char(v) => LuaValue::Integer(v[i] as i64),
      Storage::UShort(v) => LuaValue::Integer(v[i] as i64),
      Storage::Short(v) => LuaValue::Integer(v[i] as i64),
      Storage::UInt(v) => LuaValue::Integer(v[i] as i64),
      Storage::Int(v) => LuaValue::Integer(v[i] as i64),
      Storage::Float(v) => LuaValue::Number(v[i] as f64),
      Storage::Double(v) => LuaValue::Number(v[i]),
    })
  }

  /// Store `value`, converted with the saturating semantics of `as`.
  pub fn set(&mut self, index: i64, value: f64) -> LuaResult<()> {
    let i = self.slot(index)?;
    match &mut self.storage {
      Storage::UChar(v) => v[i] = value as u8,
      Storage::Char(v) => v[i] = value as i8,
      Storage::UShort(v) => v[i] = value as u16,
      Storage::Short(v) => v[i] = value as i16,
      Storage::UInt(v) => v[i] = value as u32,
      Storage::Int(v) => v[i] = value as i32,
      Storage::Float(v) => v[i] = value as f32,
      Storage::Double(v) => v[i] = value,
    }
    Ok(())
  }

  pub fn fill(&mut self, value: f64) {
    match &mut self.storage {
      Storage::UChar(v) => v.fill(value as u8),
      Storage::Char(v) => v.fill(value as i8),
      Storage::UShort(v) => v.fill(value as u16),
      Storage::Short(v) => v.fill(value as i16),
      Storage::UInt(v) => v.fill(value as u32),
      Storage::Int(v) => v.fill(value as i32),
      Storage::Float(v) => v.fill(value as f32),
      Storage::Double(v) => v.fill(value),
    }
  }
}

fn zeroed<T: Clone + Default>(len: usize) -> LuaResult<Vec<T>> {
  let mut v = Vec::new();
  v.try_reserve_exact(len)
    .map_err(|e| LuaError::external(format!("memarray allocation failed: {}", e)))?;
  v.resize(len, T::default());
  Ok(v)
}

impl LuaUserData for MemArray {
  fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
    methods.add_method("size", |_, this, ()| Ok(this.byte_size()));
    methods.add_method("type", |_, this, ()| Ok(this.kind.as_str()));
    methods.add_method_mut("fill", |_, this, value: f64| {
      this.fill(value);
      Ok(())
    });

    methods.add_meta_method(LuaMetaMethod::Index, |_, this, index: i64| this.get(index));
    methods.add_meta_method_mut(LuaMetaMethod::NewIndex, |_, this, (index, value): (i64, f64)| {
      this.set(index, value)
    });
    methods.add_meta_method(LuaMetaMethod::Len, |_, this, ()| Ok(this.len()));
    methods.add_meta_method(LuaMetaMethod::ToString, |_, this, ()| {
      Ok(format!("memarray<{}>[{}]", this.kind, this.len()))
    });
  }
}

pub fn open(lua: &Lua) -> LuaResult<LuaTable> {
  let module = lua.create_table()?;
  module.set(
    "new",
    lua.create_function(|lua, (kind, len): (String, usize)| {
      let kind = ElementType::from_name(&kind)
        .ok_or_else(|| LuaError::external(format!("unknown memarray type '{}'", kind)))?;
      lua.create_userdata(MemArray::new(kind, len)?)
    })?,
  )?;
  Ok(module)
}
