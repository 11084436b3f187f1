//! Inventory texts shown to the user

/// The ten inventory statements, in scoring order (question 1 first)
pub const QUESTIONS: [&str; 10] = [
    "私は自分に満足している",
    "時々、自分には全く価値がないと感じる",
    "私は他の人と同じくらい価値がある人間だと思う",
    "私には誇れるものがほとんどない",
    "私は自分に対してポジティブな態度を持っている",
    "自分のことをもう少し尊敬できたらいいと思う",
    "私は自分を役立つ人間だと思う",
    "時々、自分がダメな人間だと感じる",
    "全体として私は自分に満足している",
    "私は自分に対してあまり自信がない",
];

/// Answer labels for responses 1 through 6
pub const SCALE_LABELS: [&str; 6] = [
    "全くそう思わない",
    "あまりそう思わない",
    "ややそう思わない",
    "ややそう思う",
    "そう思う",
    "非常にそう思う",
];
