pub mod read_racing_line;
pub mod read_sim_pars;
pub mod sim_opts;
