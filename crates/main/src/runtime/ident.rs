////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::{
    fmt::{Debug, Display, Formatter},
    ops::Deref,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use ahash::AHashMap;
use compact_str::CompactString;
use lady_deirdre::sync::Lazy;

use crate::report::system_panic;

/// A compact identifier of an interned callable or parameter name.
///
/// Every distinct name string maps to exactly one NameId for the lifetime of
/// the process. Names are interned during warm-up, when signatures are
/// registered; afterwards the table is effectively read-only.
///
/// You can retrieve the original string using the [Display] and [Debug]
/// implementations, or the [NameId::string] function.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NameId(u32);

impl Debug for NameId {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("NameId({}: {:?})", self.0, self.string()))
    }
}

impl Display for NameId {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.string(), formatter)
    }
}

impl NameId {
    /// Returns the identifier of `name`, interning the name if it has not
    /// been seen before.
    pub fn intern(name: &str) -> Self {
        if let Some(id) = Self::lookup(name) {
            return id;
        }

        let mut table = NameTable::write();

        if let Some(id) = table.index.get(name) {
            return *id;
        }

        let id = match u32::try_from(table.names.len()) {
            Ok(index) => NameId(index),
            Err(_) => system_panic!("Name table overflow."),
        };

        let name = CompactString::from(name);

        let _ = table.index.insert(name.clone(), id);
        table.names.push(name);

        id
    }

    /// Returns the identifier of `name` if the name has been interned.
    #[inline]
    pub fn lookup(name: &str) -> Option<Self> {
        NameTable::read().index.get(name).copied()
    }

    /// Returns the original string of this identifier.
    #[inline]
    pub fn string(&self) -> CompactString {
        match NameTable::read().names.get(self.0 as usize) {
            Some(name) => name.clone(),
            None => system_panic!("Unknown name identifier {}.", self.0),
        }
    }

    /// Returns the position of this identifier in the name table.
    #[inline(always)]
    pub fn index(&self) -> u32 {
        self.0
    }
}

struct NameTable {
    index: AHashMap<CompactString, NameId>,
    names: Vec<CompactString>,
}

impl NameTable {
    #[inline(always)]
    fn get() -> &'static RwLock<Self> {
        static TABLE: Lazy<RwLock<NameTable>> = Lazy::new(|| {
            RwLock::new(NameTable {
                index: AHashMap::new(),
                names: Vec::new(),
            })
        });

        TABLE.deref()
    }

    #[inline(always)]
    fn read() -> RwLockReadGuard<'static, Self> {
        Self::get()
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    #[inline(always)]
    fn write() -> RwLockWriteGuard<'static, Self> {
        Self::get()
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::thread::spawn;

    use crate::runtime::NameId;

    #[test]
    fn test_interning_is_stable() {
        let first = NameId::intern("ident_test_alpha");
        let second = NameId::intern("ident_test_alpha");
        let other = NameId::intern("ident_test_beta");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.string(), "ident_test_alpha");
        assert_eq!(other.to_string(), "ident_test_beta");
        assert_eq!(Some(first), NameId::lookup("ident_test_alpha"));
        assert_eq!(None, NameId::lookup("ident_test_never_interned"));
    }

    #[test]
    fn test_concurrent_interning() {
        let handles = (0..8)
            .map(|_| spawn(|| NameId::intern("ident_test_shared")))
            .collect::<Vec<_>>();

        let ids = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
