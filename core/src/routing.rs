/*
 * routing.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Fuel, an HTTP client engine.
 *
 * Fuel is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Fuel is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Fuel.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Route descriptors: an enum or struct that knows its own method, path and
//! payload, compiled into a request by [`Manager::request_routing`].
//!
//! [`Manager::request_routing`]: crate::Manager::request_routing

use crate::http::{Headers, Method, Parameters};

pub trait Routing {
    /// Absolute base URL the path is joined onto.
    fn base_path(&self) -> &str;

    fn method(&self) -> Method;

    fn path(&self) -> String;

    fn params(&self) -> Parameters {
        Vec::new()
    }

    /// Headers replacing the defaults; `None` keeps them.
    fn headers(&self) -> Option<Headers> {
        None
    }

    fn body(&self) -> Option<Vec<u8>> {
        None
    }
}
