use metrics::{Unit, counter, describe_counter};

pub const MOVIES_CREATED_TOTAL: &str = "movies_created_total";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CreationSource {
    Direct,
    Imdb,
}

impl CreationSource {
    pub fn as_label(self) -> &'static str {
        match self {
            CreationSource::Direct => "direct",
            CreationSource::Imdb => "imdb",
        }
    }
}

pub fn register_metrics() {
    describe_counter!(MOVIES_CREATED_TOTAL, Unit::Count, "Movies added to the catalog, by source");
}

pub fn record_creation(source: CreationSource) {
    counter!(MOVIES_CREATED_TOTAL, "source" => source.as_label()).increment(1);
}
