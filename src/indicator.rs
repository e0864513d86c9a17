/// Progress dots: one per item, the current one active.
pub fn dots(total: usize, current: usize) -> Vec<bool> {
    (0..total).map(|index| index == current).collect()
}

pub fn render(total: usize, current: usize) -> String {
    dots(total, current)
        .into_iter()
        .map(|active| if active { '●' } else { '○' })
        .collect()
}
