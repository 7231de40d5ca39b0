//! Mocks for the collaborators of the CSV service: an output sink and a message source.
use mockall::mock;

use std::io::{self, Write};

use warehouse_csv::core::message::MessageSource;

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

mock! {
    pub Messages {}
    impl MessageSource for Messages {
        fn message(&self, code: &str) -> String;
        fn messages(&self, codes: &[String]) -> Vec<String>;
    }
}
