use crate::media::ImageOptions;

/// width and height that take part in hiding
pub(crate) fn usable_dimensions(width: u32, height: u32, opts: &ImageOptions) -> (usize, usize) {
    if opts.skip_last_row_and_column {
        (
            width.saturating_sub(1) as usize,
            height.saturating_sub(1) as usize,
        )
    } else {
        (width as usize, height as usize)
    }
}

/// Positions of the color channels in a flat RGBA buffer, transposed so the
/// image is walked column by column.
pub(crate) fn channel_positions(
    width: u32,
    height: u32,
    opts: &ImageOptions,
) -> impl Iterator<Item = usize> {
    let (use_width, use_height) = usable_dimensions(width, height, opts);
    let row_stride = width as usize;
    let channels = channel_count(opts);

    (0..use_width)
        .flat_map(move |x| {
            (0..use_height)
                .flat_map(move |y| (0..channels).map(move |c| (y * row_stride + x) * 4 + c))
        })
        .step_by(opts.color_channel_step_increment.max(1))
}

pub(crate) fn channel_position_count(width: u32, height: u32, opts: &ImageOptions) -> usize {
    let (use_width, use_height) = usable_dimensions(width, height, opts);
    let step = opts.color_channel_step_increment.max(1);

    (use_width * use_height * channel_count(opts)).div_ceil(step)
}

fn channel_count(opts: &ImageOptions) -> usize {
    if opts.skip_alpha_channel {
        3
    } else {
        4
    }
}
