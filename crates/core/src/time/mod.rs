pub mod gameweek;
