// Unit test modules

mod calibration {
    mod test_defaults;
}

mod engine {
    mod test_cache_keys;
}

mod market_data {
    mod test_csv_loader;
}

mod models {
    mod test_pricer_props;
    mod test_variance_floor;
}
