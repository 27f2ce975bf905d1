pub mod dragsim_interface;
