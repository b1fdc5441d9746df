pub mod gnuplot;
pub mod vtk;
