//! Built-in sample reviews.

use crate::models::{SampleReview, Sentiment};
use once_cell::sync::Lazy;

static CATALOG: Lazy<Vec<SampleReview>> = Lazy::new(|| {
    vec![
        SampleReview {
            id: 1,
            text: "The doctor was very professional and took time to explain my condition. The staff was friendly and the facility was clean. I felt well cared for throughout my visit.",
            expected_sentiment: Sentiment::Positive,
        },
        SampleReview {
            id: 2,
            text: "Long wait times and the receptionist was rude. The doctor seemed rushed and didn't answer my questions properly. Very disappointing experience.",
            expected_sentiment: Sentiment::Negative,
        },
        SampleReview {
            id: 3,
            text: "The appointment was okay. The doctor was competent but not particularly warm. The facility is average, nothing special but adequate.",
            expected_sentiment: Sentiment::Neutral,
        },
        SampleReview {
            id: 4,
            text: "Excellent care! The nursing staff went above and beyond to make me comfortable. The doctor was knowledgeable and compassionate. Highly recommend this clinic.",
            expected_sentiment: Sentiment::Positive,
        },
        SampleReview {
            id: 5,
            text: "Terrible experience. Had to wait 3 hours past my appointment time. The doctor was dismissive and didn't seem to care about my concerns. Will not return.",
            expected_sentiment: Sentiment::Negative,
        },
        SampleReview {
            id: 6,
            text: "The medical treatment was effective and the doctor was professional. The billing process was straightforward. Overall a standard healthcare experience.",
            expected_sentiment: Sentiment::Neutral,
        },
    ]
});

/// Upload format shown alongside the samples.
pub const CSV_FORMAT_EXAMPLE: &str = "text
\"The doctor was very professional and took time to explain my condition.\"
\"Long wait times and the receptionist was rude.\"
\"The appointment was okay. The doctor was competent but not particularly warm.\"";

pub fn all() -> &'static [SampleReview] {
    &CATALOG
}

pub fn find(id: u32) -> Option<&'static SampleReview> {
    CATALOG.iter().find(|s| s.id == id)
}
