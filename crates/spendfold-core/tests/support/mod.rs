#![allow(dead_code)]

pub mod ledger_testkit;
