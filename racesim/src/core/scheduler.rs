use crate::core::car::Car;

/// next_active_idx returns the index of the next car (after `current_idx`, wrapping around)
/// that is neither crashed nor finished. The current car itself is considered last. Returns
/// None if no car is active anymore, i.e. the session is over.
pub fn next_active_idx(cars_list: &[Car], current_idx: usize) -> Option<usize> {
    let no_cars = cars_list.len();

    (1..=no_cars)
        .map(|k| (current_idx + k) % no_cars)
        .find(|&idx| cars_list[idx].is_active())
}

/// all_inactive returns true if every car is crashed or finished.
pub fn all_inactive(cars_list: &[Car]) -> bool {
    cars_list.iter().all(|car| !car.is_active())
}
