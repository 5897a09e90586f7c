use islay::input::{PriceTable, PriceTableBuilder};

pub fn three_day_prices() -> PriceTable {
    let mut builder = PriceTableBuilder::new();
    builder
        .add_quote(10.0, 10.0, 100, "ABC")
        .add_quote(20.0, 20.0, 100, "BCD")
        .add_quote(10.0, 11.0, 200, "ABC")
        .add_quote(20.0, 19.0, 200, "BCD")
        .add_quote(12.0, 12.0, 300, "ABC")
        .add_quote(18.0, 18.0, 300, "BCD");
    builder.build().unwrap()
}

pub fn setup() {
    //Multiple tests in one binary, only the first can install the logger
    let _ = env_logger::try_init();
}
