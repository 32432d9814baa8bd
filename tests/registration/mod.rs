mod register_round_trip;
mod reset_round_trip;
