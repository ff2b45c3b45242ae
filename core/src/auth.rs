/*
 * auth.rs
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

//! Authorization header construction.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::http::headers::AUTHORIZATION;
use crate::http::Request;

/// Sets the `Authorization` header of the wrapped request.
#[derive(Debug)]
pub struct Authentication {
    request: Request,
}

impl Authentication {
    /// RFC 7617 basic credentials.
    pub fn basic(self, username: &str, password: &str) -> Request {
        let token = STANDARD.encode(format!("{}:{}", username, password));
        self.request.header(AUTHORIZATION, format!("Basic {}", token))
    }

    pub fn bearer(self, token: &str) -> Request {
        self.request.header(AUTHORIZATION, format!("Bearer {}", token))
    }
}

impl Request {
    pub fn authentication(self) -> Authentication {
        Authentication { request: self }
    }
}
