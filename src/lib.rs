#![allow(dead_code)]

pub mod warn;
pub mod myfrom;
pub mod ppath;
pub mod pattern;
pub mod http_request_method;
pub mod http_response_status_codes;
pub mod grammar;
pub mod capability;
pub mod subsite;
pub mod sitemap;
pub mod acontext;
pub mod aresponse;
pub mod webutils;
pub mod apachelog;
pub mod rouille_runner;
