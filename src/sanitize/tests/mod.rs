mod inventory_tests;
mod link_tests;
mod media_tests;

use crate::config::BrandConfig;

pub(super) fn brand() -> BrandConfig {
    BrandConfig::from_json(
        r##"{
            "name": "Acme Auto",
            "contact": {
                "phone": "(800) 555-0100",
                "email": "hello@acme.test",
                "address": {"street": "1 Brand Way", "city": "Newtown", "state": "CA", "zip": "90001"}
            },
            "social": {"facebook": "https://facebook.com/acme"},
            "dealership": {"inventory": {"placeholderCount": 3}}
        }"##,
    )
    .unwrap()
}
