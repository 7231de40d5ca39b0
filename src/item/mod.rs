/// This module provides the CSV readers, writers and helpers working on CSV documents.
pub mod csv;
