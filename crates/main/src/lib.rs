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

//! # Eidos Signatures
//!
//! The runtime calling convention of a scripting language's built-in
//! functions and methods: how each callable declares what it accepts and
//! returns, and how every call is checked against that declaration.
//!
//! The crate provides:
//!
//! - [TypeMask](runtime::TypeMask), a bitset of admissible value kinds with
//!   the optional, singleton, and ellipsis modifiers.
//! - [Signature](runtime::Signature), the declared calling convention of a
//!   free function, an instance method, or a class method, built once at
//!   warm-up through the fluent
//!   [SignatureBuilder](runtime::SignatureBuilder).
//! - The argument checker, and the singular and aggregate return checkers.
//! - The accelerated hook that lets an instance method compute the results
//!   of a whole batch of receivers in one call.
//! - A [Registry](runtime::Registry) of callables with lookup, did-you-mean
//!   suggestions, and dispatch helpers for interpreters.
//!
//! ## Logging
//!
//! The crate reports registration and dispatch events through the [log]
//! facade under the [REGISTRY_LOG](runtime::REGISTRY_LOG) and
//! [DISPATCH_LOG](runtime::DISPATCH_LOG) targets. It never installs a logger
//! on its own.

pub mod config;
mod report;
pub mod runtime;

pub extern crate lady_deirdre;
