// Unit object file reader
//
//  Copyright (C) 2014-2023 Ryan Specialty, LLC.
//
//  This file is part of flexld.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Unit object file reader.
//!
//! This defines a lower-level event-based [`UnitReader`] similar to that
//!   of [`quick_xml`] (see [`UnitEvent`]),
//!     where the events are a slightly higher-level abstraction over the
//!     types of nodes present in the file.
//!
//! For more information on unit object files,
//!   see the [parent module][super].
//!
//!
//! How To Use
//! ==========
//! The next [`UnitEvent`] is retrieved using [`UnitReader::read_event`]
//!   until [`UnitEvent::Eof`] is reached.
//! Most callers will want [`read_units`] instead,
//!   which collects the events of an entire file into a [`UnitObject`].
//!
//! ```
//! use flexld::obj::unit::{read_units, UnitReader};
//!
//! let xml = br#"<units>
//!     <import path="base.xml" />
//!     <unit name="app:Main">
//!       <def id="app:Main" />
//!       <pre id="app:Base" />
//!     </unit>
//!   </units>"#;
//!
//! let object = read_units(&mut UnitReader::new(&xml[..]))?;
//!
//! assert_eq!(vec!["base.xml".to_string()], object.imports);
//! assert_eq!("app:Main", object.units[0].name);
//! assert_eq!(vec!["app:Base".to_string()], object.units[0].prerequisites);
//! # Ok::<(), flexld::obj::unit::UnitObjError>(())
//! ```

use super::{UnitObjError, UnitResult};
use crate::ld::Unit;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesStart;
use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader as XmlReader;
use std::io::BufRead;

/// Unit attributes parsed from a `unit` element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnitAttrs {
    /// `@name`.
    pub name: String,
    /// `@mod`.
    pub last_modified: Option<u64>,
    /// `@size`.
    pub size: Option<u64>,
    /// `@optimizedsize`.
    pub optimized_size: Option<u64>,
    /// Whether `@native` is `true`.
    pub native: bool,
}

impl From<UnitAttrs> for Unit {
    fn from(attrs: UnitAttrs) -> Self {
        Self {
            native: attrs.native,
            last_modified: attrs.last_modified,
            size: attrs.size,
            optimized_size: attrs.optimized_size,
            ..Unit::new(attrs.name)
        }
    }
}

/// Unit object file event.
///
/// References ([`Def`](UnitEvent::Def), [`Pre`](UnitEvent::Pre),
///   [`Dep`](UnitEvent::Dep))
///   are always preceded by a [`UnitStart`](UnitEvent::UnitStart) and
///   followed eventually by a [`UnitEnd`](UnitEvent::UnitEnd).
#[derive(Debug, PartialEq, Eq)]
pub enum UnitEvent {
    /// Import of another unit object file (`import/@path`).
    Import(String),
    /// Beginning of a unit.
    UnitStart(UnitAttrs),
    /// Definition provided by the current unit.
    Def(String),
    /// Prerequisite of the current unit.
    Pre(String),
    /// Dependency of the current unit.
    Dep(String),
    /// End of the current unit.
    UnitEnd,
    /// End of file.
    Eof,
}

/// Wrapper around [`quick_xml::Reader`] for reading unit object files.
///
/// See [module-level documentation](self) for more information and
///   examples.
pub struct UnitReader<B>
where
    B: BufRead,
{
    /// Source XML reader.
    reader: XmlReader<B>,

    /// Internal buffer for [`XmlReader`].
    buffer: Vec<u8>,

    /// Buffer used to skip unrecognized elements.
    sub_buffer: Vec<u8>,

    /// Whether the root has been validated.
    seen_root: bool,

    /// Name of the unit currently being read, if any.
    unit: Option<String>,

    /// The current unit was an empty element and its
    ///   [`UnitEvent::UnitEnd`] has not yet been emitted.
    pending_end: bool,
}

impl<B> UnitReader<B>
where
    B: BufRead,
{
    /// Construct a new reader.
    pub fn new(reader: B) -> Self {
        let mut reader = XmlReader::from_reader(reader);

        // unit object files are compiler output
        reader.check_end_names(false);

        Self {
            reader,
            buffer: Vec::new(),
            sub_buffer: Vec::new(),
            seen_root: false,
            unit: None,
            pending_end: false,
        }
    }

    /// Continue reading and produce the next event.
    ///
    /// Elements that are not recognized are skipped along with their
    ///   children.
    ///
    /// Errors
    /// ======
    /// - Any of [`UnitObjError`].
    pub fn read_event(&mut self) -> UnitResult<UnitEvent> {
        if self.pending_end {
            self.pending_end = false;
            self.unit = None;

            return Ok(UnitEvent::UnitEnd);
        }

        loop {
            self.buffer.clear();
            self.sub_buffer.clear();

            let event = self.reader.read_event(&mut self.buffer)?;

            if !self.seen_root {
                match &event {
                    XmlEvent::Start(ele) | XmlEvent::Empty(ele) => {
                        if ele.name() != b"units" {
                            return Err(UnitObjError::UnexpectedRoot(
                                String::from_utf8_lossy(ele.name())
                                    .into_owned(),
                            ));
                        }

                        self.seen_root = true;
                        continue;
                    }
                    XmlEvent::Eof => return Err(UnitObjError::MissingRoot),
                    _ => continue,
                }
            }

            let (ele, empty) = match event {
                XmlEvent::Start(ele) => (ele, false),
                XmlEvent::Empty(ele) => (ele, true),

                XmlEvent::End(ele) if ele.name() == b"unit" => {
                    if self.unit.take().is_some() {
                        return Ok(UnitEvent::UnitEnd);
                    }

                    continue;
                }

                XmlEvent::Eof => {
                    return match self.unit {
                        Some(_) => Err(UnitObjError::UnexpectedEof),
                        None => Ok(UnitEvent::Eof),
                    }
                }

                _ => continue,
            };

            match ele.name() {
                b"unit" => {
                    let attrs = Self::process_unit(&ele)?;

                    if self.unit.is_some() {
                        return Err(UnitObjError::NestedUnit(attrs.name));
                    }

                    self.unit = Some(attrs.name.clone());
                    self.pending_end = empty;

                    return Ok(UnitEvent::UnitStart(attrs));
                }

                name @ (b"def" | b"pre" | b"dep") => {
                    let id = Self::process_ref(&ele)?;

                    if self.unit.is_none() {
                        return Err(UnitObjError::OrphanRef(
                            String::from_utf8_lossy(name).into_owned(),
                            id,
                        ));
                    }

                    return Ok(match name {
                        b"def" => UnitEvent::Def(id),
                        b"pre" => UnitEvent::Pre(id),
                        _ => UnitEvent::Dep(id),
                    });
                }

                b"import" => {
                    let path = Self::process_import(&ele)?;

                    if self.unit.is_some() {
                        return Err(UnitObjError::NestedImport(path));
                    }

                    return Ok(UnitEvent::Import(path));
                }

                _ if !empty => {
                    self.reader.read_to_end(ele.name(), &mut self.sub_buffer)?;
                }

                _ => (),
            }
        }
    }

    /// Process `unit` element attributes.
    ///
    /// Errors
    /// ======
    /// - [`UnitObjError::UnassociatedUnit`] if missing `unit/@name`.
    /// - [`UnitObjError::InvalidNumber`] if a size or modification time
    ///   is not an unsigned integer.
    fn process_unit(ele: &BytesStart) -> UnitResult<UnitAttrs> {
        let mut name = None;
        let mut attrs = UnitAttrs::default();

        for attr in ele.attributes().with_checks(false).filter_map(Result::ok) {
            match attr.key {
                b"name" => {
                    name = Some(Self::attr_string(&attr)?);
                }

                b"mod" => {
                    attrs.last_modified =
                        Some(Self::attr_number("mod", &attr)?);
                }

                b"size" => {
                    attrs.size = Some(Self::attr_number("size", &attr)?);
                }

                b"optimizedsize" => {
                    attrs.optimized_size =
                        Some(Self::attr_number("optimizedsize", &attr)?);
                }

                b"native" => {
                    attrs.native = &*attr.value == b"true";
                }

                _ => (),
            }
        }

        attrs.name = name.ok_or(UnitObjError::UnassociatedUnit)?;

        Ok(attrs)
    }

    /// Process `@id` of a `def`, `pre`, or `dep` element.
    ///
    /// Errors
    /// ======
    /// - [`UnitObjError::UnassociatedRef`] if missing `@id`.
    fn process_ref(ele: &BytesStart) -> UnitResult<String> {
        for attr in ele.attributes().with_checks(false).filter_map(Result::ok) {
            if attr.key == b"id" {
                return Self::attr_string(&attr);
            }
        }

        Err(UnitObjError::UnassociatedRef(
            String::from_utf8_lossy(ele.name()).into_owned(),
        ))
    }

    /// Process `import/@path`.
    ///
    /// Errors
    /// ======
    /// - [`UnitObjError::UnassociatedImport`] if missing `import/@path`.
    fn process_import(ele: &BytesStart) -> UnitResult<String> {
        for attr in ele.attributes().with_checks(false).filter_map(Result::ok) {
            if attr.key == b"path" {
                return Self::attr_string(&attr);
            }
        }

        Err(UnitObjError::UnassociatedImport)
    }

    fn attr_string(attr: &Attribute) -> UnitResult<String> {
        let value = attr.unescaped_value()?;

        Ok(std::str::from_utf8(&value)?.to_string())
    }

    fn attr_number(
        key: &str,
        attr: &Attribute,
    ) -> UnitResult<u64> {
        let value = Self::attr_string(attr)?;

        value
            .parse()
            .map_err(|_| UnitObjError::InvalidNumber(key.into(), value))
    }
}

/// Contents of a single unit object file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UnitObject {
    /// Units in declaration order.
    pub units: Vec<Unit>,
    /// Paths of imported unit object files,
    ///   relative to the importing file.
    pub imports: Vec<String>,
}

/// Read every event of a unit object file into a [`UnitObject`].
pub fn read_units<B: BufRead>(
    reader: &mut UnitReader<B>,
) -> UnitResult<UnitObject> {
    let mut object = UnitObject::default();
    let mut current: Option<Unit> = None;

    loop {
        match reader.read_event()? {
            UnitEvent::Import(path) => object.imports.push(path),
            UnitEvent::UnitStart(attrs) => current = Some(attrs.into()),

            // The reader guarantees that references appear within a unit.
            UnitEvent::Def(id) => {
                if let Some(unit) = current.as_mut() {
                    unit.definitions.push(id);
                }
            }
            UnitEvent::Pre(id) => {
                if let Some(unit) = current.as_mut() {
                    unit.prerequisites.push(id);
                }
            }
            UnitEvent::Dep(id) => {
                if let Some(unit) = current.as_mut() {
                    unit.dependencies.push(id);
                }
            }

            UnitEvent::UnitEnd => object.units.extend(current.take()),
            UnitEvent::Eof => break,
        }
    }

    Ok(object)
}
