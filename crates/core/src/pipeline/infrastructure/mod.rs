pub mod threaded_frame_loop;
