/*
 *  lib.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

pub mod config;
pub mod cycle;
pub mod eta;
pub mod fonts;
pub mod layout;
pub mod pages;
pub mod providers;
pub mod render;
pub mod samples;
pub mod schedule;
pub mod sink;
pub mod supervisor;
pub mod track;
