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

use std::fmt::{Debug, Formatter};

use ahash::AHashMap;
use compact_str::CompactString;

/// Guidance texts appended to argument diagnostics of callables whose call
/// form has changed over the language's history.
///
/// The [Registry](crate::runtime::Registry) owns one table and attaches the
/// matching entry to every signature registered without a
/// [hint](crate::runtime::SignatureBuilder::hint) of its own.
///
/// The [Default] table is seeded with the [historical](Self::historical)
/// entries.
#[derive(Clone)]
pub struct HintTable {
    entries: AHashMap<CompactString, CompactString>,
}

impl Debug for HintTable {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_map()
            .entries(self.entries.iter())
            .finish()
    }
}

impl Default for HintTable {
    #[inline(always)]
    fn default() -> Self {
        Self::historical()
    }
}

impl HintTable {
    /// Creates a table without entries.
    #[inline(always)]
    pub fn empty() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }

    /// Creates a table with the entries for callables restructured in past
    /// releases.
    pub fn historical() -> Self {
        let mut table = Self::empty();

        table.insert(
            "defineSpatialMap",
            "note that the signature of defineSpatialMap() changed in SLiM 3.5; \
            consult the manual for the new call form",
        );

        table
    }

    /// Adds or replaces the guidance for the callable `name`.
    #[inline(always)]
    pub fn insert(&mut self, name: &str, guidance: &str) {
        let _ = self
            .entries
            .insert(CompactString::from(name), CompactString::from(guidance));
    }

    /// Removes the guidance for the callable `name`, returning it if it was
    /// present.
    #[inline(always)]
    pub fn remove(&mut self, name: &str) -> Option<CompactString> {
        self.entries.remove(name)
    }

    /// Returns the guidance for the callable `name`.
    #[inline(always)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(CompactString::as_str)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
