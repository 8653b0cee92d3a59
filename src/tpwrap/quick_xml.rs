// `quick-xml` wrappers
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

//! Wrappers around [`quick_xml`] for object file readers.

use std::fmt::Display;

/// Wrapped error type.
pub type InnerXmlError = quick_xml::Error;

/// [`quick_xml::Error`] with a [`PartialEq`] implementation,
///   so that object file errors can derive it and be compared in tests.
///
/// Two wrapped errors are never equal.
#[derive(Debug)]
pub struct Error(pub InnerXmlError);

impl PartialEq for Error {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

impl From<InnerXmlError> for Error {
    fn from(e: InnerXmlError) -> Self {
        Self(e)
    }
}

impl From<Error> for InnerXmlError {
    fn from(e: Error) -> Self {
        e.0
    }
}

impl Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        Display::fmt(&self.0, fmt)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn never_equal() {
        let a: Error = InnerXmlError::UnexpectedEof("a".into()).into();
        let b: Error = InnerXmlError::UnexpectedEof("a".into()).into();

        assert_ne!(a, b);
    }

    #[test]
    fn displays_inner_error() {
        let inner = InnerXmlError::UnexpectedEof("Comment".into());
        let expected = inner.to_string();

        assert_eq!(expected, Error(inner).to_string());
    }
}
