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

//! Configuration of the callable registry.

use crate::runtime::BuildMode;

/// A general configuration object for the
/// [Registry](crate::runtime::Registry).
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
#[non_exhaustive]
pub struct RegistryConfig {
    /// If set to true, signatures registered through the registry are built
    /// in [BuildMode::FaultTolerant] mode unless the builder sets a mode
    /// explicitly: malformed parameter declarations are logged and skipped
    /// instead of failing the registration.
    ///
    /// The default value is false.
    pub fault_tolerant: bool,

    /// If set to true, the dispatch functions validate every produced result
    /// against the callable's declared return contract before handing it to
    /// the caller.
    ///
    /// The default value is true.
    pub verify_returns: bool,

    /// If set to true, lookups of unknown callable names report the closest
    /// registered name as a suggestion.
    ///
    /// The default value is true.
    pub suggest_names: bool,

    /// The minimum normalized similarity (between 0.0 and 1.0) of a
    /// registered name to be suggested for an unknown one.
    ///
    /// The default value is 0.7.
    pub suggestion_threshold: f64,
}

impl Default for RegistryConfig {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryConfig {
    /// The default constructor for this configuration object.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            fault_tolerant: false,
            verify_returns: true,
            suggest_names: true,
            suggestion_threshold: 0.7,
        }
    }

    /// Returns the build mode implied by the
    /// [fault_tolerant](Self::fault_tolerant) flag.
    #[inline(always)]
    pub const fn build_mode(&self) -> BuildMode {
        match self.fault_tolerant {
            true => BuildMode::FaultTolerant,
            false => BuildMode::Strict,
        }
    }
}
